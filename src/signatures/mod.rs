// SPDX-License-Identifier: PMPL-1.0-or-later

//! Known failure signatures matched against crash logs.
//!
//! A signature is a literal marker string paired with fixed remediation
//! advice and an attribution kind. Matching is substring and shape
//! recognition only; the log is never parsed into a grammar.

mod rules;

pub use rules::signature_table;

use regex::Regex;

/// How a matched signature gets attributed to installed mods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    /// Locate the missing classes inside archive entry lists.
    MissingClass,
    /// Cross-reference stack-frame segments against the inventory.
    StackFrame,
}

/// A known failure marker paired with fixed remediation advice.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: &'static str,
    pub advice: &'static str,
    pub kind: SignatureKind,
}

impl Signature {
    pub fn matches(&self, log_text: &str) -> bool {
        log_text.contains(self.name)
    }
}

/// Class names reported missing by the runtime, in occurrence order.
pub fn missing_classes(log_text: &str) -> Vec<String> {
    let re = Regex::new(r"ClassNotFoundException: ([\w.]+)").unwrap();
    re.captures_iter(log_text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Dotted class name in archive-internal path form.
pub fn class_entry_path(class_name: &str) -> String {
    class_name.replace('.', "/")
}

/// Stack-frame chains in `context`: `at `-prefixed dot-separated
/// identifier chains ending in a capitalized segment.
pub fn stack_frame_chains(context: &str) -> Vec<String> {
    let re = Regex::new(r"at ((?:[A-Za-z0-9_]+\.)+[A-Z][A-Za-z0-9_]*)").unwrap();
    re.captures_iter(context)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_class_names() {
        let log = "java.lang.ClassNotFoundException: com.example.magic.MagicCore\n\
                   some other line\n\
                   java.lang.ClassNotFoundException: net.other.Thing";
        let classes = missing_classes(log);
        assert_eq!(
            classes,
            vec!["com.example.magic.MagicCore", "net.other.Thing"]
        );
    }

    #[test]
    fn converts_dotted_class_to_entry_path() {
        assert_eq!(
            class_entry_path("com.example.magic.MagicCore"),
            "com/example/magic/MagicCore"
        );
    }

    #[test]
    fn extracts_capitalized_frame_chains() {
        let context = "\tat net.sodium.mixin.RenderMixin.apply(RenderMixin.java:10)\n\
                       \tat java.base/jdk.internal.loader.Something(Unknown Source)";
        let chains = stack_frame_chains(context);
        assert!(chains.contains(&"net.sodium.mixin.RenderMixin".to_string()));
    }

    #[test]
    fn ignores_chains_without_capitalized_tail() {
        let chains = stack_frame_chains("status at net.lowercase.only here");
        assert!(chains.is_empty());
    }
}
