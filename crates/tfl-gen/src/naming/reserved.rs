use std::{collections::HashSet, sync::LazyLock};

pub(crate) static FORBIDDEN_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen", "self", "Self", "_",
  ]
  .into_iter()
  .collect()
});

/// Type names the generated modules import or rely on from the prelude.
pub(crate) static RESERVED_TYPE_NAMES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "Box", "Clone", "Copy", "Debug", "Default", "Deserialize", "Display", "Err", "HashMap", "None", "Ok", "Option",
    "ResponseModel", "Result", "Self", "Send", "Serialize", "Sized", "Some", "String", "Sync", "Type", "Value", "Vec",
  ]
  .into_iter()
  .collect()
});

/// Field names that are keywords in the client languages the wire schema is shared with.
pub(crate) static CROSS_LANGUAGE_RESERVED: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "and", "assert", "case", "catch", "class", "def", "del", "delete", "elif", "except", "finally", "from", "function",
    "global", "import", "instanceof", "interface", "is", "lambda", "new", "nonlocal", "not", "null", "or", "package",
    "pass", "private", "protected", "public", "raise", "switch", "this", "throw", "var", "void", "with",
  ]
  .into_iter()
  .collect()
});

/// Module stems that collide with files the emitter writes itself.
pub(crate) static RESERVED_MODULE_STEMS: LazyLock<HashSet<&str>> =
  LazyLock::new(|| ["mod", "registry", "models", "clients"].into_iter().collect());

pub(crate) fn is_reserved_type_name(name: &str) -> bool {
  FORBIDDEN_IDENTIFIERS.contains(name) || RESERVED_TYPE_NAMES.contains(name)
}

pub(crate) fn is_reserved_field_name(name: &str) -> bool {
  FORBIDDEN_IDENTIFIERS.contains(name) || CROSS_LANGUAGE_RESERVED.contains(name)
}

pub(crate) fn is_reserved_module_stem(stem: &str) -> bool {
  FORBIDDEN_IDENTIFIERS.contains(stem) || RESERVED_MODULE_STEMS.contains(stem)
}
