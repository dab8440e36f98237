use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
  String,
  Integer,
  Number,
  Boolean,
}

impl Primitive {
  /// Maps an OpenAPI `type` tag. `object`, `array` and unknown tags are handled by the caller.
  pub fn from_type_tag(tag: &str) -> Option<Self> {
    match tag {
      "string" => Some(Self::String),
      "integer" => Some(Self::Integer),
      "number" => Some(Self::Number),
      "boolean" => Some(Self::Boolean),
      _ => None,
    }
  }
}

impl ToTokens for Primitive {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let ts = match self {
      Self::String => quote! { String },
      Self::Integer => quote! { i64 },
      Self::Number => quote! { f64 },
      Self::Boolean => quote! { bool },
    };
    tokens.extend(ts);
  }
}

/// Target-side type of a field, list item, or alias.
///
/// Optionality is a property of the owning field and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeDescriptor {
  Primitive(Primitive),
  /// A JSON object with arbitrary keys.
  Map,
  /// Any JSON value.
  Any,
  Named(String),
  /// A reference that was late-bound to break a cycle.
  Forward(String),
  List(Box<TypeDescriptor>),
}

impl TypeDescriptor {
  pub fn named(name: impl Into<String>) -> Self {
    Self::Named(name.into())
  }

  pub fn list(inner: TypeDescriptor) -> Self {
    Self::List(Box::new(inner))
  }

  /// The descriptor with all list wrappers removed.
  pub fn innermost(&self) -> &TypeDescriptor {
    match self {
      Self::List(inner) => inner.innermost(),
      other => other,
    }
  }

  /// Name of the model this type ultimately refers to, if any.
  pub fn referenced_model(&self) -> Option<&str> {
    match self.innermost() {
      Self::Named(name) | Self::Forward(name) => Some(name),
      _ => None,
    }
  }

  pub fn is_forward(&self) -> bool {
    matches!(self.innermost(), Self::Forward(_))
  }

  /// Rewrites the innermost named reference to a forward reference, keeping the list wrappers.
  #[must_use]
  pub fn to_forward(&self) -> Self {
    match self {
      Self::Named(name) => Self::Forward(name.clone()),
      Self::List(inner) => Self::list(inner.to_forward()),
      other => other.clone(),
    }
  }

  /// Replaces an innermost reference to a model rejected by `known` with [`Self::Any`], keeping
  /// the list wrappers. Returns the dropped name.
  pub fn degrade_unknown(&mut self, known: &impl Fn(&str) -> bool) -> Option<String> {
    match self {
      Self::List(inner) => inner.degrade_unknown(known),
      Self::Named(name) | Self::Forward(name) if !known(name.as_str()) => {
        let name = std::mem::take(name);
        *self = Self::Any;
        Some(name)
      }
      _ => None,
    }
  }

  pub fn uses_map(&self) -> bool {
    matches!(self.innermost(), Self::Map)
  }

  pub fn uses_any(&self) -> bool {
    matches!(self.innermost(), Self::Any)
  }

  /// Tokens for this type in a position where a forward reference needs indirection.
  ///
  /// A top-level forward reference becomes `Box<T>`; list items stay unboxed.
  pub fn field_tokens(&self) -> TokenStream {
    match self {
      Self::Forward(name) => {
        let ident = format_ident!("{name}");
        quote! { Box<#ident> }
      }
      other => other.to_token_stream(),
    }
  }
}

impl ToTokens for TypeDescriptor {
  fn to_tokens(&self, tokens: &mut TokenStream) {
    let ts = match self {
      Self::Primitive(primitive) => quote! { #primitive },
      Self::Map => quote! { HashMap<String, Value> },
      Self::Any => quote! { Value },
      Self::Named(name) | Self::Forward(name) => {
        let ident = format_ident!("{name}");
        quote! { #ident }
      }
      Self::List(inner) => quote! { Vec<#inner> },
    };
    tokens.extend(ts);
  }
}

impl std::fmt::Display for TypeDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Primitive(Primitive::String) => f.write_str("String"),
      Self::Primitive(Primitive::Integer) => f.write_str("i64"),
      Self::Primitive(Primitive::Number) => f.write_str("f64"),
      Self::Primitive(Primitive::Boolean) => f.write_str("bool"),
      Self::Map => f.write_str("HashMap<String, Value>"),
      Self::Any => f.write_str("Value"),
      Self::Named(name) => f.write_str(name),
      Self::Forward(name) => write!(f, "Box<{name}>"),
      Self::List(inner) => write!(f, "Vec<{}>", inner.as_ref().without_box()),
    }
  }
}

impl TypeDescriptor {
  fn without_box(&self) -> String {
    match self {
      Self::Forward(name) => name.clone(),
      other => other.to_string(),
    }
  }
}
