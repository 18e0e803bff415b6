//! Scope tracking for early errors
//!
//! The parser pushes a [`Scope`] for every function, block, catch clause and
//! class body it enters, and declares each binding it sees. Redeclaration
//! and the legality of `await`, `yield`, `super` and `new.target` are all
//! answered from this stack.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScopeFlags: u16 {
        const TOP = 1;
        const FUNCTION = 1 << 1;
        const ASYNC = 1 << 2;
        const GENERATOR = 1 << 3;
        const ARROW = 1 << 4;
        /// Catch clause with a plain identifier parameter
        const SIMPLE_CATCH = 1 << 5;
        /// `super.x` allowed
        const SUPER = 1 << 6;
        /// `super()` allowed
        const DIRECT_SUPER = 1 << 7;
        const CLASS_STATIC_BLOCK = 1 << 8;
        const CLASS_FIELD_INIT = 1 << 9;
        /// Body of a `switch`; `using` declarations are not allowed here
        const SWITCH = 1 << 10;
        /// Scopes that hold `var` declarations
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::CLASS_STATIC_BLOCK.bits();
    }
}

impl ScopeFlags {
    pub fn function(is_async: bool, generator: bool) -> Self {
        let mut flags = ScopeFlags::FUNCTION;
        flags.set(ScopeFlags::ASYNC, is_async);
        flags.set(ScopeFlags::GENERATOR, generator);
        flags
    }
}

/// How a name is being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Not a binding (assignment target)
    None,
    Var,
    Lexical,
    Function,
    /// The parameter of a `catch (e)` clause
    SimpleCatch,
    /// Bound in an outer scope (function expression and class names)
    Outside,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub flags: ScopeFlags,
    pub var: FxHashSet<String>,
    pub lexical: FxHashSet<String>,
    pub functions: FxHashSet<String>,
    /// Name of the simple catch parameter, which `var` may redeclare
    pub catch_param: Option<String>,
}

impl Scope {
    pub fn new(flags: ScopeFlags) -> Self {
        Scope {
            flags,
            var: FxHashSet::default(),
            lexical: FxHashSet::default(),
            functions: FxHashSet::default(),
            catch_param: None,
        }
    }
}

/// Stack of lexical scopes for one parse
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    in_module: bool,
    ecma_version: u32,
    allow_await_outside_function: bool,
    allow_super_outside_method: bool,
    /// Exported local names not (yet) declared at top level, in export order
    undefined_exports: Vec<(String, usize)>,
}

impl ScopeStack {
    pub fn new(
        in_module: bool,
        ecma_version: u32,
        allow_await_outside_function: bool,
        allow_super_outside_method: bool,
    ) -> Self {
        ScopeStack {
            scopes: Vec::new(),
            in_module,
            ecma_version,
            allow_await_outside_function,
            allow_super_outside_method,
            undefined_exports: Vec::new(),
        }
    }

    pub fn enter(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope::new(flags));
    }

    pub fn exit(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    fn current_flags(&self) -> ScopeFlags {
        self.current().map_or(ScopeFlags::TOP, |s| s.flags)
    }

    /// Nearest scope that holds `var` bindings
    pub fn current_var_scope(&self) -> ScopeFlags {
        self.scopes
            .iter()
            .rev()
            .find(|s| {
                s.flags.intersects(
                    ScopeFlags::VAR | ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::CLASS_STATIC_BLOCK,
                )
            })
            .map_or(ScopeFlags::TOP, |s| s.flags)
    }

    /// Nearest scope that binds `this`; arrows do not
    pub fn current_this_scope(&self) -> ScopeFlags {
        self.scopes
            .iter()
            .rev()
            .find(|s| {
                s.flags.intersects(
                    ScopeFlags::VAR | ScopeFlags::CLASS_FIELD_INIT | ScopeFlags::CLASS_STATIC_BLOCK,
                ) && !s.flags.contains(ScopeFlags::ARROW)
            })
            .map_or(ScopeFlags::TOP, |s| s.flags)
    }

    fn treat_functions_as_var_in(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION)
            || (!self.in_module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// Function declarations in the current scope behave like `var`
    pub fn treat_functions_as_var(&self) -> bool {
        self.current()
            .is_some_and(|scope| self.treat_functions_as_var_in(scope))
    }

    /// Record a binding. Returns `true` if it conflicts with an existing one.
    pub fn declare_name(&mut self, name: &str, kind: BindingKind) -> bool {
        let treat_functions_as_var = self.treat_functions_as_var();
        let in_module = self.in_module;
        let mut redeclared = false;
        match kind {
            BindingKind::Lexical => {
                let Some(scope) = self.scopes.last_mut() else {
                    return false;
                };
                redeclared = scope.lexical.contains(name)
                    || scope.functions.contains(name)
                    || scope.var.contains(name);
                scope.lexical.insert(name.to_string());
                let top = scope.flags.contains(ScopeFlags::TOP);
                if in_module && top {
                    self.undefined_exports.retain(|(n, _)| n != name);
                }
            }
            BindingKind::SimpleCatch => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.lexical.insert(name.to_string());
                    scope.catch_param = Some(name.to_string());
                }
            }
            BindingKind::Function => {
                let Some(scope) = self.scopes.last_mut() else {
                    return false;
                };
                redeclared = if treat_functions_as_var {
                    scope.lexical.contains(name)
                } else {
                    scope.lexical.contains(name) || scope.var.contains(name)
                };
                scope.functions.insert(name.to_string());
            }
            BindingKind::Var | BindingKind::None | BindingKind::Outside => {
                for i in (0..self.scopes.len()).rev() {
                    let Some(scope) = self.scopes.get(i) else {
                        break;
                    };
                    let catch_exception = scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                        && scope.catch_param.as_deref() == Some(name);
                    let function_clash = !self.treat_functions_as_var_in(scope)
                        && scope.functions.contains(name);
                    if (scope.lexical.contains(name) && !catch_exception) || function_clash {
                        redeclared = true;
                        break;
                    }
                    let Some(scope) = self.scopes.get_mut(i) else {
                        break;
                    };
                    scope.var.insert(name.to_string());
                    let flags = scope.flags;
                    if in_module && flags.contains(ScopeFlags::TOP) {
                        self.undefined_exports.retain(|(n, _)| n != name);
                    }
                    if flags.intersects(ScopeFlags::VAR) {
                        break;
                    }
                }
            }
        }
        redeclared
    }

    /// Note a local name exported by `export { name }`. It must be declared
    /// at top level by the end of the module.
    pub fn check_local_export(&mut self, name: &str, pos: usize) {
        let Some(top) = self.scopes.first() else {
            return;
        };
        if !top.lexical.contains(name) && !top.var.contains(name) {
            self.undefined_exports.push((name.to_string(), pos));
        }
    }

    /// Exported names that were never declared
    pub fn undefined_exports(&self) -> &[(String, usize)] {
        &self.undefined_exports
    }

    pub fn in_function(&self) -> bool {
        self.current_var_scope().contains(ScopeFlags::FUNCTION)
    }

    pub fn in_generator(&self) -> bool {
        self.current_var_scope().contains(ScopeFlags::GENERATOR)
    }

    pub fn in_async(&self) -> bool {
        self.current_var_scope().contains(ScopeFlags::ASYNC)
    }

    pub fn in_class_static_block(&self) -> bool {
        self.current_var_scope()
            .contains(ScopeFlags::CLASS_STATIC_BLOCK)
    }

    /// Is `await` an operator here?
    pub fn can_await(&self) -> bool {
        for scope in self.scopes.iter().rev() {
            let flags = scope.flags;
            if flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT) {
                return false;
            }
            if flags.contains(ScopeFlags::FUNCTION) {
                return flags.contains(ScopeFlags::ASYNC);
            }
        }
        (self.in_module && self.ecma_version >= 13) || self.allow_await_outside_function
    }

    pub fn allow_super(&self) -> bool {
        self.current_this_scope().contains(ScopeFlags::SUPER) || self.allow_super_outside_method
    }

    pub fn allow_direct_super(&self) -> bool {
        self.current_this_scope().contains(ScopeFlags::DIRECT_SUPER)
    }

    pub fn allow_new_dot_target(&self) -> bool {
        self.scopes.iter().rev().any(|scope| {
            let flags = scope.flags;
            flags.intersects(ScopeFlags::CLASS_STATIC_BLOCK | ScopeFlags::CLASS_FIELD_INIT)
                || (flags.contains(ScopeFlags::FUNCTION) && !flags.contains(ScopeFlags::ARROW))
        })
    }

    /// `using` declarations need a block, function or module scope
    pub fn allow_using(&self) -> bool {
        let flags = self.current_flags();
        if flags.contains(ScopeFlags::SWITCH) {
            return false;
        }
        !(!self.in_module && flags.contains(ScopeFlags::TOP))
    }
}

/// How a private name was declared in a class body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateNameKind {
    /// Field, method or a complete getter/setter pair
    Plain,
    InstanceGetter,
    InstanceSetter,
    StaticGetter,
    StaticSetter,
}

#[derive(Debug, Default)]
struct ClassPrivateNames {
    declared: FxHashMap<String, PrivateNameKind>,
    used: Vec<(String, usize)>,
}

/// Private names declared and used in each enclosing class body
#[derive(Debug, Default)]
pub struct PrivateNameStack {
    classes: Vec<ClassPrivateNames>,
}

impl PrivateNameStack {
    pub fn enter_class_body(&mut self) {
        self.classes.push(ClassPrivateNames::default());
    }

    /// Leave a class body. Names used but not declared move to the
    /// enclosing class; at the outermost class the first of them is
    /// returned as unresolved.
    pub fn exit_class_body(&mut self) -> Option<(String, usize)> {
        let ClassPrivateNames { declared, used } = self.classes.pop()?;
        let mut unresolved = used.into_iter().filter(|(name, _)| !declared.contains_key(name));
        match self.classes.last_mut() {
            Some(parent) => {
                parent.used.extend(unresolved);
                None
            }
            None => unresolved.next(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Record a `#name` reference. Returns `false` outside any class.
    pub fn use_name(&mut self, name: &str, pos: usize) -> bool {
        match self.classes.last_mut() {
            Some(class) => {
                class.used.push((name.to_string(), pos));
                true
            }
            None => false,
        }
    }

    /// Declare a private name in the current class body. Returns `true` on
    /// conflict. A getter and setter of the same staticness may share a name.
    pub fn declare(&mut self, name: &str, kind: PrivateNameKind) -> bool {
        let Some(class) = self.classes.last_mut() else {
            return false;
        };
        use PrivateNameKind::*;
        match class.declared.get(name).copied() {
            None => {
                class.declared.insert(name.to_string(), kind);
                false
            }
            Some(InstanceGetter) if kind == InstanceSetter => {
                class.declared.insert(name.to_string(), Plain);
                false
            }
            Some(InstanceSetter) if kind == InstanceGetter => {
                class.declared.insert(name.to_string(), Plain);
                false
            }
            Some(StaticGetter) if kind == StaticSetter => {
                class.declared.insert(name.to_string(), Plain);
                false
            }
            Some(StaticSetter) if kind == StaticGetter => {
                class.declared.insert(name.to_string(), Plain);
                false
            }
            Some(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> ScopeStack {
        let mut stack = ScopeStack::new(false, 17, false, false);
        stack.enter(ScopeFlags::TOP);
        stack
    }

    #[test]
    fn test_lexical_redeclaration() {
        let mut stack = script();
        assert!(!stack.declare_name("x", BindingKind::Lexical));
        assert!(stack.declare_name("x", BindingKind::Lexical));
    }

    #[test]
    fn test_var_redeclaration_allowed() {
        let mut stack = script();
        assert!(!stack.declare_name("x", BindingKind::Var));
        assert!(!stack.declare_name("x", BindingKind::Var));
        assert!(stack.declare_name("x", BindingKind::Lexical));
    }

    #[test]
    fn test_var_hoists_through_blocks() {
        let mut stack = script();
        stack.declare_name("x", BindingKind::Lexical);
        stack.enter(ScopeFlags::empty());
        assert!(stack.declare_name("x", BindingKind::Var));
    }

    #[test]
    fn test_simple_catch_param_may_be_redeclared_by_var() {
        let mut stack = script();
        stack.enter(ScopeFlags::SIMPLE_CATCH);
        stack.declare_name("e", BindingKind::SimpleCatch);
        assert!(!stack.declare_name("e", BindingKind::Var));
        stack.exit();
        stack.enter(ScopeFlags::empty());
        stack.declare_name("e", BindingKind::Lexical);
        assert!(stack.declare_name("e", BindingKind::Var));
    }

    #[test]
    fn test_functions_in_blocks() {
        let mut stack = script();
        assert!(!stack.declare_name("f", BindingKind::Function));
        assert!(!stack.declare_name("f", BindingKind::Var));
        stack.enter(ScopeFlags::empty());
        assert!(!stack.declare_name("g", BindingKind::Function));
        assert!(stack.declare_name("g", BindingKind::Lexical));
    }

    #[test]
    fn test_module_top_level_functions_are_lexical() {
        let mut stack = ScopeStack::new(true, 17, false, false);
        stack.enter(ScopeFlags::TOP);
        stack.declare_name("f", BindingKind::Function);
        assert!(stack.declare_name("f", BindingKind::Var));
    }

    #[test]
    fn test_await_and_super() {
        let mut stack = script();
        assert!(!stack.can_await());
        stack.enter(ScopeFlags::function(true, false) | ScopeFlags::SUPER);
        assert!(stack.can_await());
        assert!(stack.allow_super());
        stack.enter(ScopeFlags::function(false, false) | ScopeFlags::ARROW);
        assert!(!stack.can_await());
        assert!(stack.allow_super());
        assert!(stack.allow_new_dot_target());

        let mut module = ScopeStack::new(true, 13, false, false);
        module.enter(ScopeFlags::TOP);
        assert!(module.can_await());
    }

    #[test]
    fn test_undefined_exports() {
        let mut stack = ScopeStack::new(true, 17, false, false);
        stack.enter(ScopeFlags::TOP);
        stack.check_local_export("a", 9);
        stack.check_local_export("b", 12);
        stack.declare_name("a", BindingKind::Var);
        assert_eq!(stack.undefined_exports(), &[("b".to_string(), 12)]);
    }

    #[test]
    fn test_private_names() {
        let mut names = PrivateNameStack::default();
        assert!(!names.use_name("x", 0));
        names.enter_class_body();
        assert!(!names.declare("a", PrivateNameKind::InstanceGetter));
        assert!(!names.declare("a", PrivateNameKind::InstanceSetter));
        assert!(names.declare("a", PrivateNameKind::Plain));
        assert!(!names.declare("b", PrivateNameKind::StaticGetter));
        assert!(names.declare("b", PrivateNameKind::InstanceSetter));
        names.use_name("c", 20);
        names.enter_class_body();
        names.use_name("a", 30);
        assert_eq!(names.exit_class_body(), None);
        assert_eq!(names.exit_class_body(), Some(("c".to_string(), 20)));
    }
}
