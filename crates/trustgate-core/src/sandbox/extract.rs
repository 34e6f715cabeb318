//! Fenced code sample extraction from markdown documentation.

use regex::Regex;

use super::error::{SandboxError, SandboxResult};

/// Return the bodies of every fenced block whose info string is one of
/// `languages` (case-insensitive), in document order. Blank blocks are dropped.
pub fn extract_code_samples(doc: &str, languages: &[String]) -> SandboxResult<Vec<String>> {
    if languages.is_empty() {
        return Ok(Vec::new());
    }
    let alternation = languages
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    let fence = Regex::new(&format!(r"(?is)```(?:{alternation})[ \t]*\r?\n(.*?)```"))
        .map_err(|e| SandboxError::InvalidConfig(format!("fence languages: {e}")))?;

    Ok(fence
        .captures_iter(doc)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .filter(|s| !s.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> Vec<String> {
        vec!["python".to_string(), "py".to_string()]
    }

    #[test]
    fn test_extracts_python_and_py_fences() {
        let doc = "intro\n```python\nprint(1)\n```\ntext\n```py\nx = 2\n```\n";
        let samples = extract_code_samples(doc, &langs()).unwrap();
        assert_eq!(samples, vec!["print(1)".to_string(), "x = 2".to_string()]);
    }

    #[test]
    fn test_ignores_other_languages() {
        let doc = "```bash\npip install x\n```\n```pyx\ncdef int a\n```\n```\nplain\n```";
        assert!(extract_code_samples(doc, &langs()).unwrap().is_empty());
    }

    #[test]
    fn test_fence_language_ignores_case() {
        let doc = "```Python\nprint(1)\n```\n```PY\nprint(2)\n```";
        let samples = extract_code_samples(doc, &langs()).unwrap();
        assert_eq!(samples, vec!["print(1)".to_string(), "print(2)".to_string()]);
    }

    #[test]
    fn test_no_fences() {
        assert!(extract_code_samples("# Title\nno code here", &langs())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_multiline_body_is_kept_whole() {
        let doc = "```python\nimport math\n\nprint(math.pi)\n```";
        let samples = extract_code_samples(doc, &langs()).unwrap();
        assert_eq!(samples[0], "import math\n\nprint(math.pi)");
    }
}
