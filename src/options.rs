//! Parser configuration
//!
//! `Options` can be built in code or deserialized from JSON:
//!
//! ```
//! use ecmaparse::Options;
//!
//! let options: Options =
//!     serde_json::from_str(r#"{ "ecmaVersion": 2020, "sourceType": "module" }"#).unwrap();
//! assert_eq!(options.ecma_version.resolve(), 11);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::lexer::{Comment, Token};

/// Highest edition number understood by the parser (ES2026)
pub const LATEST_ECMA_VERSION: u32 = 17;

/// The ECMAScript edition to parse against.
///
/// Accepts edition numbers (`3`, `5`, `6`..`17`), year numbers (`2015`..`2026`)
/// or `"latest"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawVersion", into = "RawVersion")]
pub enum EcmaVersion {
    #[default]
    Latest,
    Version(u32),
}

impl EcmaVersion {
    /// Normalize to an edition number (`2015` becomes `6`).
    pub fn resolve(self) -> u32 {
        match self {
            EcmaVersion::Latest => LATEST_ECMA_VERSION,
            EcmaVersion::Version(v) if v >= 2015 => (v - 2009).min(LATEST_ECMA_VERSION),
            EcmaVersion::Version(v) => v.min(LATEST_ECMA_VERSION),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Number(u32),
    Name(String),
}

impl TryFrom<RawVersion> for EcmaVersion {
    type Error = String;

    fn try_from(raw: RawVersion) -> Result<Self, Self::Error> {
        match raw {
            RawVersion::Number(v @ (3 | 5..=17 | 2015..=2026)) => Ok(EcmaVersion::Version(v)),
            RawVersion::Number(v) => Err(format!("unsupported ecmaVersion {v}")),
            RawVersion::Name(name) if name == "latest" => Ok(EcmaVersion::Latest),
            RawVersion::Name(name) => Err(format!("unsupported ecmaVersion {name:?}")),
        }
    }
}

impl From<EcmaVersion> for RawVersion {
    fn from(version: EcmaVersion) -> Self {
        match version {
            EcmaVersion::Latest => RawVersion::Name("latest".to_string()),
            EcmaVersion::Version(v) => RawVersion::Number(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
}

/// Whether reserved words may be used as identifiers.
///
/// `Never` additionally forbids them as property names in ES3 mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReserved", into = "RawReserved")]
pub enum AllowReserved {
    Yes,
    No,
    Never,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawReserved {
    Flag(bool),
    Name(String),
}

impl TryFrom<RawReserved> for AllowReserved {
    type Error = String;

    fn try_from(raw: RawReserved) -> Result<Self, Self::Error> {
        match raw {
            RawReserved::Flag(true) => Ok(AllowReserved::Yes),
            RawReserved::Flag(false) => Ok(AllowReserved::No),
            RawReserved::Name(name) if name == "never" => Ok(AllowReserved::Never),
            RawReserved::Name(name) => Err(format!("invalid allowReserved value {name:?}")),
        }
    }
}

impl From<AllowReserved> for RawReserved {
    fn from(value: AllowReserved) -> Self {
        match value {
            AllowReserved::Yes => RawReserved::Flag(true),
            AllowReserved::No => RawReserved::Flag(false),
            AllowReserved::Never => RawReserved::Name("never".to_string()),
        }
    }
}

/// A shared callback invoked synchronously, in source order.
pub struct Callback<T>(Rc<RefCell<dyn FnMut(&T)>>);

impl<T> Callback<T> {
    pub fn new(f: impl FnMut(&T) + 'static) -> Self {
        Callback(Rc::new(RefCell::new(f)))
    }

    pub(crate) fn call(&self, value: &T) {
        let mut f = self.0.borrow_mut();
        (&mut *f)(value)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Callback(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub ecma_version: EcmaVersion,
    pub source_type: SourceType,
    /// `None` picks `Yes` for ES3 and `No` otherwise.
    pub allow_reserved: Option<AllowReserved>,
    pub allow_return_outside_function: bool,
    pub allow_import_export_everywhere: bool,
    /// Allow `await` at the top level of scripts. Modules always allow it
    /// from ES2022 on.
    pub allow_await_outside_function: bool,
    pub allow_super_outside_method: bool,
    /// `None` allows a `#!` line from ES2023 on.
    pub allow_hash_bang: Option<bool>,
    pub check_private_fields: bool,
    pub locations: bool,
    pub ranges: bool,
    pub source_file: Option<String>,
    #[serde(skip)]
    pub on_token: Option<Callback<Token>>,
    #[serde(skip)]
    pub on_comment: Option<Callback<Comment>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ecma_version: EcmaVersion::Latest,
            source_type: SourceType::Script,
            allow_reserved: None,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_await_outside_function: false,
            allow_super_outside_method: false,
            allow_hash_bang: None,
            check_private_fields: true,
            locations: false,
            ranges: false,
            source_file: None,
            on_token: None,
            on_comment: None,
        }
    }
}

impl Options {
    pub fn module() -> Self {
        Options {
            source_type: SourceType::Module,
            ..Options::default()
        }
    }

    pub fn with_ecma_version(mut self, version: u32) -> Self {
        self.ecma_version = EcmaVersion::Version(version);
        self
    }

    pub fn with_locations(mut self) -> Self {
        self.locations = true;
        self
    }

    pub fn with_ranges(mut self) -> Self {
        self.ranges = true;
        self
    }

    pub fn on_token(mut self, f: impl FnMut(&Token) + 'static) -> Self {
        self.on_token = Some(Callback::new(f));
        self
    }

    pub fn on_comment(mut self, f: impl FnMut(&Comment) + 'static) -> Self {
        self.on_comment = Some(Callback::new(f));
        self
    }

    pub fn is_module(&self) -> bool {
        self.source_type == SourceType::Module
    }

    pub(crate) fn allow_reserved(&self) -> AllowReserved {
        self.allow_reserved.unwrap_or(if self.ecma_version.resolve() < 5 {
            AllowReserved::Yes
        } else {
            AllowReserved::No
        })
    }

    pub(crate) fn allow_hash_bang(&self) -> bool {
        self.allow_hash_bang
            .unwrap_or_else(|| self.ecma_version.resolve() >= 14)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_versions() {
        assert_eq!(EcmaVersion::Version(2015).resolve(), 6);
        assert_eq!(EcmaVersion::Version(2022).resolve(), 13);
        assert_eq!(EcmaVersion::Version(5).resolve(), 5);
        assert_eq!(EcmaVersion::Latest.resolve(), LATEST_ECMA_VERSION);
    }

    #[test]
    fn test_deserialize_options() {
        let options: Options = serde_json::from_str(
            r#"{
                "ecmaVersion": "latest",
                "sourceType": "module",
                "allowReserved": "never",
                "locations": true
            }"#,
        )
        .unwrap();
        assert_eq!(options.ecma_version, EcmaVersion::Latest);
        assert!(options.is_module());
        assert_eq!(options.allow_reserved(), AllowReserved::Never);
        assert!(options.locations);
        assert!(!options.ranges);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let result: Result<Options, _> = serde_json::from_str(r#"{"ecmaVersion":4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_follow_version() {
        let es3 = Options::default().with_ecma_version(3);
        assert_eq!(es3.allow_reserved(), AllowReserved::Yes);
        assert!(!es3.allow_hash_bang());
        let latest = Options::default();
        assert_eq!(latest.allow_reserved(), AllowReserved::No);
        assert!(latest.allow_hash_bang());
    }

    #[test]
    fn test_callback_is_shared_between_clones() {
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let cb: Callback<u32> = Callback::new(move |v| *counter.borrow_mut() += *v);
        let copy = cb.clone();
        cb.call(&2);
        copy.call(&3);
        assert_eq!(*seen.borrow(), 5);
    }
}
