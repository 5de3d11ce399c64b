use super::*;

#[test]
fn infers_common_snippets() {
    assert_eq!(
        LanguageFamily::infer("const add = (a, b) => a + b;\nconsole.log(add(1, 2));"),
        LanguageFamily::JavaScript
    );
    assert_eq!(
        LanguageFamily::infer("def add(a, b):\n    return a + b\nprint(add(1, 2))"),
        LanguageFamily::Python
    );
    assert_eq!(
        LanguageFamily::infer("package main\n\nfunc main() {\n\tx := 1\n}"),
        LanguageFamily::Go
    );
    assert_eq!(
        LanguageFamily::infer("public class Main {\n  public static void main(String[] a) {}\n}"),
        LanguageFamily::Java
    );
}

#[test]
fn js_imports_are_not_python() {
    assert_eq!(
        LanguageFamily::infer("import fs from 'fs'\nfs.readFileSync('x')"),
        LanguageFamily::JavaScript
    );
}

#[test]
fn family_tables() {
    assert!(LanguageFamily::Python.is_keyword("def"));
    assert!(!LanguageFamily::JavaScript.is_keyword("def"));
    assert_eq!(LanguageFamily::Python.line_comment(), "#");
    assert!(!LanguageFamily::Python.has_block_comments());
    assert_eq!(LanguageFamily::Java.file_name(), "Main.java");
    assert_eq!(LanguageFamily::default(), LanguageFamily::JavaScript);
}

#[test]
fn serde_uses_lowercase_names() {
    let v: LanguageFamily = serde_json::from_str("\"go\"").unwrap();
    assert_eq!(v, LanguageFamily::Go);
    assert_eq!(
        serde_json::to_string(&LanguageFamily::JavaScript).unwrap(),
        "\"javascript\""
    );
}
