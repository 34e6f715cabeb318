//! Dangerous-construct scanner for code samples.
//!
//! A blacklist, not an isolation boundary. See
//! [`SANDBOX_LIMITATIONS`](super::SANDBOX_LIMITATIONS).

use std::sync::OnceLock;

use regex::Regex;

/// Named patterns, matched case-insensitively anywhere in the sample.
const DANGER_PATTERNS: &[(&str, &str)] = &[
    ("os.system", r"os\.system"),
    ("os.exec", r"os\.exec\w*"),
    ("os.spawn", r"os\.spawn\w*"),
    ("os.popen", r"os\.popen"),
    ("os_import", r"from\s+os\s+import\s+.*\b(?:system|popen|exec\w*|spawn\w*)"),
    ("pty.spawn", r"pty\.spawn"),
    ("subprocess", r"subprocess\."),
    ("subprocess_import", r"(?:from|import)\s+subprocess\b"),
    ("exec", r"exec\("),
    ("eval", r"eval\("),
    ("dynamic_import", r"__import__"),
    ("importlib", r"\bimportlib\b"),
    ("import_module", r"\bimport_module\s*\("),
    ("open", r"open\("),
    ("requests", r"requests\."),
    ("urllib", r"urllib\."),
    ("urllib3", r"\burllib3\b"),
    ("http.client", r"http\.client"),
    ("httpx", r"\bhttpx\b"),
    ("aiohttp", r"\baiohttp\b"),
    ("socket", r"socket\."),
    ("rm_flag", r"rm\s+-"),
    ("rm_root", r"rm\s+/"),
    ("redirect", r">"),
    ("pipe", r"\|"),
    ("and_chain", r"&&"),
    ("semicolon", r";"),
    ("backtick", r"`"),
    ("command_substitution", r"\$\("),
];

fn compiled() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DANGER_PATTERNS
            .iter()
            .map(|(name, pattern)| {
                let re = Regex::new(&format!("(?i){pattern}"))
                    .expect("danger pattern must compile");
                (*name, re)
            })
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Safe,
    Unsafe { matched: Vec<&'static str> },
}

impl ScanVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, ScanVerdict::Safe)
    }
}

/// Check a sample against every danger pattern, collecting all matches.
pub fn scan_sample(code: &str) -> ScanVerdict {
    let matched: Vec<&'static str> = compiled()
        .iter()
        .filter(|(_, re)| re.is_match(code))
        .map(|(name, _)| *name)
        .collect();
    if matched.is_empty() {
        ScanVerdict::Safe
    } else {
        ScanVerdict::Unsafe { matched }
    }
}
