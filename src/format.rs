//! Named string formats
//!
//! A `format` keyword on a string node names an entry in the
//! [`FormatRegistry`]. Entries are either a regular expression or a
//! predicate over the string.

use std::fmt;
use std::net::Ipv6Addr;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ValidatorError};

/// Signature of a predicate format
pub type FormatFn = dyn Fn(&str) -> bool + Send + Sync;

/// How a format decides whether a string conforms
#[derive(Clone)]
pub enum FormatChecker {
    Pattern(Regex),
    Predicate(Arc<FormatFn>),
}

impl FormatChecker {
    /// Compile `pattern` into a pattern checker
    pub fn pattern(name: &str, pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(FormatChecker::Pattern)
            .map_err(|source| ValidatorError::InvalidFormatPattern {
                name: name.to_string(),
                source,
            })
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        FormatChecker::Predicate(Arc::new(f))
    }

    pub fn check(&self, input: &str) -> bool {
        match self {
            FormatChecker::Pattern(re) => re.is_match(input),
            FormatChecker::Predicate(f) => f(input),
        }
    }
}

impl fmt::Debug for FormatChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatChecker::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            FormatChecker::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Table of named formats, in registration order
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    entries: IndexMap<String, FormatChecker>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    /// An empty registry; every `format` keyword will be rejected
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The standard set of formats
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, pattern) in BUILTIN_PATTERNS.iter() {
            registry.register(*name, FormatChecker::Pattern(pattern.clone()));
        }
        registry.register("utc-millisec", FormatChecker::predicate(is_utc_millisec));
        registry.register("regex", FormatChecker::predicate(|s| Regex::new(s).is_ok()));
        // E.123 is too loose to check meaningfully
        registry.register("phone", FormatChecker::predicate(|_| true));
        registry.register("email", FormatChecker::predicate(is_email));
        registry.register("ipv6", FormatChecker::predicate(|s| s.parse::<Ipv6Addr>().is_ok()));
        registry
    }

    /// Register or override a named format
    pub fn register(
        &mut self,
        name: impl Into<String>,
        checker: FormatChecker,
    ) -> Option<FormatChecker> {
        self.entries.insert(name.into(), checker)
    }

    pub fn get(&self, name: &str) -> Option<&FormatChecker> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Check `input` against a format; `None` if the format is unknown
    pub fn check(&self, name: &str, input: &str) -> Option<bool> {
        self.get(name).map(|checker| checker.check(input))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

const CSS_COLOR_NAMES: &[&str] = &[
    "maroon", "red", "orange", "yellow", "olive", "green", "purple", "fuchsia", "lime", "teal",
    "aqua", "blue", "navy", "black", "gray", "silver", "white", "indianred", "lightcoral",
    "salmon", "darksalmon", "lightsalmon", "crimson", "firebrick", "darkred", "pink",
    "lightpink", "hotpink", "deeppink", "mediumvioletred", "palevioletred", "coral", "tomato",
    "orangered", "darkorange", "gold", "lightyellow", "lemonchiffon", "lightgoldenrodyellow",
    "papayawhip", "moccasin", "peachpuff", "palegoldenrod", "khaki", "darkkhaki", "lavender",
    "thistle", "plum", "violet", "orchid", "magenta", "mediumorchid", "mediumpurple",
    "amethyst", "blueviolet", "darkviolet", "darkorchid", "darkmagenta", "indigo", "slateblue",
    "darkslateblue", "mediumslateblue", "greenyellow", "chartreuse", "lawngreen", "limegreen",
    "palegreen", "lightgreen", "mediumspringgreen", "springgreen", "mediumseagreen",
    "seagreen", "forestgreen", "darkgreen", "yellowgreen", "olivedrab", "darkolivegreen",
    "mediumaquamarine", "darkseagreen", "lightseagreen", "darkcyan", "cyan", "lightcyan",
    "paleturquoise", "aquamarine", "turquoise", "mediumturquoise", "darkturquoise",
    "cadetblue", "steelblue", "lightsteelblue", "powderblue", "lightblue", "skyblue",
    "lightskyblue", "deepskyblue", "dodgerblue", "cornflowerblue", "royalblue", "mediumblue",
    "darkblue", "midnightblue", "cornsilk", "blanchedalmond", "bisque", "navajowhite", "wheat",
    "burlywood", "tan", "rosybrown", "sandybrown", "goldenrod", "darkgoldenrod", "peru",
    "chocolate", "saddlebrown", "sienna", "brown", "snow", "honeydew", "mintcream", "azure",
    "aliceblue", "ghostwhite", "whitesmoke", "seashell", "beige", "oldlace", "floralwhite",
    "ivory", "antiquewhite", "linen", "lavenderblush", "mistyrose", "gainsboro", "lightgrey",
    "darkgray", "dimgray", "lightslategray", "slategray", "darkslategray",
];

const OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
const RGB_COMPONENT: &str = r"\s*(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\s*";
const RGB_PERCENT: &str = r"\s*(?:100%|\d?\d%)\s*";

const HOST_LABEL: &str = r"(?:[a-zA-Z]|[a-zA-Z][a-zA-Z0-9\-]*[a-zA-Z0-9])";

const URI_UNRESERVED: &str = r"a-z0-9\-._~!$&'()*+,;=";

fn uri_pattern() -> String {
    let u = URI_UNRESERVED;
    let pct = "%[0-9a-f]{2}";
    format!(
        concat!(
            r"(?i)^(?:",
            r"[a-z0-9+.\-]+://",
            r"(?:(?:[{u}:]|{pct})*@)?",
            r"(?:[{u}]|{pct})*",
            r"(?::\d*)?",
            r"(?:/(?:[{u}:@/]|{pct})*)?",
            r"|[a-z0-9+.\-]+:(?:/?(?:[{u}:@]|{pct})+(?:[{u}:@/]|{pct})*)?",
            r")",
            r"(?:\?(?:[{u}:/?@]|{pct})*)?",
            r"(?:#(?:[{u}:/?@]|{pct})*)?$"
        ),
        u = u,
        pct = pct
    )
}

fn color_pattern() -> String {
    format!(
        concat!(
            r"(?i)^(?:#?(?:[0-9a-f]{{3}}|[0-9a-f]{{6}})",
            r"|rgb\({c},{c},{c}\)|rgb\({p},{p},{p}\)",
            r"|(?:{names}))$"
        ),
        c = RGB_COMPONENT,
        p = RGB_PERCENT,
        names = CSS_COLOR_NAMES.join("|"),
    )
}

static BUILTIN_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let sources = vec![
        (
            "date-time",
            concat!(
                r"^\d{4}-\d{2}-\d{2}",
                r"T\d{2}:\d{2}:\d{2}(?:\.\d{1,3})?(?:Z|[+\-]\d{2}:\d{2})$"
            )
            .to_string(),
        ),
        ("date", r"^\d{4}-\d{2}-\d{2}$".to_string()),
        ("time", r"^\d{2}:\d{2}:\d{2}(?:\.\d{1,3})?$".to_string()),
        ("color", color_pattern()),
        ("style", r"^\s*[^:]+\s*:\s*[^:;]+\s*;?\s*$".to_string()),
        ("uri", uri_pattern()),
        ("ip-address", format!(r"^(?:{o}\.){{3}}{o}$", o = OCTET)),
        ("host-name", format!(r"^(?:{l}\.)*{l}$", l = HOST_LABEL)),
    ];
    sources
        .into_iter()
        .map(|(name, source)| (name, Regex::new(&source).expect("builtin format pattern")))
        .collect()
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~\-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~\-]+)*@",
        r"(?:(?:(?:xn--)?[a-z0-9]+(?:-[a-z0-9]+)*\.)+[a-z][a-z0-9]*(?:-[a-z0-9]+)*",
        r"|\[(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}",
        r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\])$"
    ))
    .expect("builtin email pattern")
});

fn is_email(input: &str) -> bool {
    let Some((local, domain)) = input.rsplit_once('@') else {
        return false;
    };
    input.len() <= 254
        && local.len() <= 64
        && domain.split('.').all(|label| label.len() < 64)
        && EMAIL.is_match(input)
}

/// Leading integer after optional whitespace and sign
fn is_utc_millisec(input: &str) -> bool {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}
