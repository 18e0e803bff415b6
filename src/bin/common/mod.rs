//! Shared setup for the profiling binaries

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber filtered by `ECMAPARSE_LOG`, or `RUST_LOG`
/// when that is unset. Logging stays off when neither is set.
pub fn init_tracing() {
    let filter = match std::env::var("ECMAPARSE_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
        Err(_) => return,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Realistic JavaScript of at least `size` bytes. Every chunk is wrapped in
/// a block so repeated declarations do not clash.
pub fn generate_source(size: usize) -> String {
    let patterns = [
        r#"
class Counter extends Base {
    #count = 0;
    static instances = 0;

    constructor(name, initialValue = 0) {
        super();
        this.name = name;
        this.#count = initialValue;
        Counter.instances++;
    }

    get value() { return this.#count; }
    increment() { this.#count++; return this; }
    static { this.registry = new Map(); }
}
"#,
        r#"
function process(data) {
    const { items, meta = {} } = data;
    return items.map((item) => ({
        ...item,
        processed: true,
        timestamp: Date.now(),
        label: `${meta.prefix ?? "item"}-${item.id}`,
    }));
}
const arrow = async (x) => {
    await delay(100);
    return x ** 2;
};
"#,
        r#"
if (condition && otherCondition) {
    for (let i = 0; i < items.length; i++) {
        const item = items[i];
        switch (item.type) {
            case "a": handleA(item); break;
            case "b": handleB(item); break;
            default: handleDefault(item);
        }
    }
} else {
    try {
        riskyOperation?.();
    } catch (error) {
        console.error(error.message.replace(/\s+/g, " "));
    }
}
"#,
        r#"
const config = {
    name: "MyApp",
    version: "1.0.0",
    settings: { debug: true, logLevel: "info", retries: 1_000 },
    endpoints: [
        { path: "/api/users", method: "GET" },
        { path: "/api/posts", method: "POST" },
    ],
};
const [first, ...rest] = numbers.filter(n => n > 0).map(n => n * 2);
"#,
    ];

    let mut source = String::with_capacity(size);
    let mut i = 0;
    while source.len() < size {
        if let Some(pattern) = patterns.get(i % patterns.len()) {
            source.push('{');
            source.push_str(pattern);
            source.push_str("}\n\n");
        }
        i += 1;
    }
    source
}
