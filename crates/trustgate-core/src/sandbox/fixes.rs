//! Bounded auto-fixes applied to safe samples before a retry.
//!
//! Only three rewrites exist: prepend missing imports, substitute model-name
//! placeholders with the artifact's id, and wrap the body in an error
//! handler. None of them add file, network or process access; the result is
//! scanned again before it runs.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

struct FixPatterns {
    torch_use: Regex,
    torch_import: Regex,
    numpy_use: Regex,
    numpy_import: Regex,
    transformers_name: Regex,
    quoted_placeholder: Regex,
    bare_placeholder: Regex,
    placeholder_assignment: Regex,
}

fn patterns() -> &'static FixPatterns {
    static PATTERNS: OnceLock<FixPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FixPatterns {
        torch_use: Regex::new(r"\btorch\.").expect("torch pattern must compile"),
        torch_import: Regex::new(r"(?m)^\s*(?:import torch\b|from torch\b)")
            .expect("torch import pattern must compile"),
        numpy_use: Regex::new(r"\bnp\.").expect("numpy pattern must compile"),
        numpy_import: Regex::new(r"(?m)^\s*import numpy as np\b")
            .expect("numpy import pattern must compile"),
        transformers_name: Regex::new(r"\b(Auto[A-Za-z]+|pipeline)\b")
            .expect("transformers pattern must compile"),
        quoted_placeholder: Regex::new(
            r#"["'](?:model|model_name|model_id|your[-_]model(?:[-_]name)?|<model(?:[-_]name)?>|MODEL_NAME)["']"#,
        )
        .expect("placeholder pattern must compile"),
        bare_placeholder: Regex::new(r"\bmodel_(?:name|id)\b")
            .expect("bare placeholder pattern must compile"),
        placeholder_assignment: Regex::new(r"(?m)^\s*model_(?:name|id)\s*=")
            .expect("assignment pattern must compile"),
    })
}

/// Apply every fix to `code`, substituting `model_id` for placeholders.
pub fn apply_safe_fixes(code: &str, model_id: &str) -> String {
    let with_names = substitute_placeholders(code, model_id);
    let with_imports = prepend_missing_imports(&with_names);
    wrap_in_error_handler(&with_imports)
}

fn substitute_placeholders(code: &str, model_id: &str) -> String {
    let p = patterns();
    let literal = python_string_literal(model_id);
    let replaced = p.quoted_placeholder.replace_all(code, literal.as_str());

    if p.placeholder_assignment.is_match(&replaced) {
        replaced.into_owned()
    } else {
        p.bare_placeholder
            .replace_all(&replaced, literal.as_str())
            .into_owned()
    }
}

fn prepend_missing_imports(code: &str) -> String {
    let p = patterns();
    let mut header = Vec::new();

    if p.torch_use.is_match(code) && !p.torch_import.is_match(code) {
        header.push("import torch".to_string());
    }

    let missing: BTreeSet<&str> = p
        .transformers_name
        .find_iter(code)
        .map(|m| m.as_str())
        .filter(|name| !imported(code, name))
        .collect();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.into_iter().collect();
        header.push(format!("from transformers import {}", names.join(", ")));
    }

    if p.numpy_use.is_match(code) && !p.numpy_import.is_match(code) {
        header.push("import numpy as np".to_string());
    }

    if header.is_empty() {
        code.to_string()
    } else {
        format!("{}\n{}", header.join("\n"), code)
    }
}

fn imported(code: &str, name: &str) -> bool {
    code.lines()
        .filter(|l| l.trim_start().starts_with("from ") || l.trim_start().starts_with("import "))
        .any(|l| l.split(|c: char| !c.is_alphanumeric() && c != '_').any(|t| t == name))
}

fn wrap_in_error_handler(code: &str) -> String {
    // `from __future__` imports must stay first and at module level.
    let (future, rest): (Vec<&str>, Vec<&str>) = code
        .lines()
        .partition(|l| l.trim_start().starts_with("from __future__ import"));
    let preamble: String = future.iter().map(|l| format!("{}\n", l.trim())).collect();
    let body: Vec<String> = rest
        .into_iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("    {l}")
            }
        })
        .collect();
    format!(
        "{preamble}import sys\n\ntry:\n{}\n    pass\nexcept Exception as exc:\n    print(f\"error: {{exc}}\", file=sys.stderr)\n    sys.exit(1)\n",
        body.join("\n")
    )
}

fn python_string_literal(value: &str) -> String {
    let escaped: String = value
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '\\' => vec!['\\', '\\'],
            '"' => vec!['\\', '"'],
            other => vec![other],
        })
        .collect();
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::scan::scan_sample;

    #[test]
    fn test_prepends_torch_import() {
        let fixed = prepend_missing_imports("x = torch.zeros(2)");
        assert!(fixed.starts_with("import torch\n"));
    }

    #[test]
    fn test_keeps_existing_imports() {
        let code = "import torch\nx = torch.ones(1)";
        assert_eq!(prepend_missing_imports(code), code);
    }

    #[test]
    fn test_collects_transformers_names() {
        let code = "tok = AutoTokenizer.from_pretrained(m)\nmodel = AutoModelForCausalLM.from_pretrained(m)";
        let fixed = prepend_missing_imports(code);
        assert!(fixed.starts_with("from transformers import AutoModelForCausalLM, AutoTokenizer\n"));
    }

    #[test]
    fn test_substitutes_quoted_placeholder() {
        let fixed = substitute_placeholders("m = AutoModel.from_pretrained(\"model\")", "acme/tiny");
        assert_eq!(fixed, "m = AutoModel.from_pretrained(\"acme/tiny\")");
    }

    #[test]
    fn test_bare_identifier_replaced_only_when_unassigned() {
        let fixed = substitute_placeholders("m = load(model_name)", "acme/tiny");
        assert_eq!(fixed, "m = load(\"acme/tiny\")");

        let code = "model_name = \"x/y\"\nm = load(model_name)";
        assert_eq!(substitute_placeholders(code, "acme/tiny"), code);
    }

    #[test]
    fn test_model_id_is_escaped() {
        assert_eq!(python_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_wrapped_body_is_indented_and_exits_nonzero() {
        let fixed = wrap_in_error_handler("print(1)\n\nprint(2)");
        assert!(fixed.contains("try:\n    print(1)\n\n    print(2)\n    pass\n"));
        assert!(fixed.contains("sys.exit(1)"));
    }

    #[test]
    fn test_future_imports_stay_above_try_block() {
        let fixed = apply_safe_fixes(
            "from __future__ import annotations\nx = torch.ones(1)\nprint(x)",
            "acme/tiny",
        );
        assert!(fixed.starts_with("from __future__ import annotations\nimport sys\n"));
        assert!(!fixed.contains("    from __future__"));
        assert!(fixed.contains("try:\n    import torch\n    x = torch.ones(1)\n"));
    }

    #[test]
    fn test_fixed_code_stays_scan_clean() {
        let fixed = apply_safe_fixes("out = AutoModel.from_pretrained('model')\nprint(torch.ones(1))", "acme/tiny");
        assert!(scan_sample(&fixed).is_safe());
    }
}
