use super::{Documentation, TypeDescriptor};

/// One field of a record model.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct FieldDef {
  /// Identifier used in generated code.
  #[builder(into)]
  pub ident: String,
  /// Property name as it appears in JSON.
  #[builder(into)]
  pub wire_name: String,
  pub ty: TypeDescriptor,
  #[builder(default)]
  pub required: bool,
  #[builder(default)]
  pub docs: Documentation,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EnumVariant {
  pub tag: String,
  pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
  Record { fields: Vec<FieldDef> },
  ListAlias { item: TypeDescriptor },
  /// An object schema without properties.
  Open,
  Scalar { ty: TypeDescriptor },
  Enum { variants: Vec<EnumVariant> },
}

impl ModelKind {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Record { .. } => "record",
      Self::ListAlias { .. } => "list",
      Self::Open => "open",
      Self::Scalar { .. } => "scalar",
      Self::Enum { .. } => "enum",
    }
  }

  /// Kinds emitted as `type` aliases.
  pub fn is_alias(&self) -> bool {
    matches!(self, Self::ListAlias { .. } | Self::Scalar { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct GeneratedModel {
  #[builder(into)]
  pub name: String,
  pub kind: ModelKind,
  /// Schema component the model was built from, before sanitizing.
  #[builder(into, default)]
  pub source: String,
  #[builder(default)]
  pub docs: Documentation,
  #[builder(default)]
  pub cyclic: bool,
  /// Emit an alias kind as a transparent tuple struct, giving an alias-only cycle a nominal type.
  #[builder(default)]
  pub newtype: bool,
}

impl GeneratedModel {
  #[cfg(test)]
  pub fn fields(&self) -> &[FieldDef] {
    match &self.kind {
      ModelKind::Record { fields } => fields,
      _ => &[],
    }
  }

  /// Every type descriptor the model mentions, in declaration order.
  pub fn type_descriptors(&self) -> Vec<&TypeDescriptor> {
    match &self.kind {
      ModelKind::Record { fields } => fields.iter().map(|f| &f.ty).collect(),
      ModelKind::ListAlias { item } => vec![item],
      ModelKind::Scalar { ty } => vec![ty],
      ModelKind::Open | ModelKind::Enum { .. } => vec![],
    }
  }

  /// Field names paired with their descriptors, for in-place rewrites.
  pub fn type_descriptors_mut(&mut self) -> Vec<(&str, &mut TypeDescriptor)> {
    match &mut self.kind {
      ModelKind::Record { fields } => fields.iter_mut().map(|f| (f.wire_name.as_str(), &mut f.ty)).collect(),
      ModelKind::ListAlias { item } => vec![("items", item)],
      ModelKind::Scalar { ty } => vec![("type", ty)],
      ModelKind::Open | ModelKind::Enum { .. } => vec![],
    }
  }

  /// Models this one refers to, paired with whether the reference is forward.
  pub fn references(&self) -> Vec<(&str, bool)> {
    self
      .type_descriptors()
      .into_iter()
      .filter_map(|ty| ty.referenced_model().map(|name| (name, ty.is_forward())))
      .collect()
  }

  pub fn list_item(&self) -> Option<&TypeDescriptor> {
    match &self.kind {
      ModelKind::ListAlias { item } => Some(item),
      _ => None,
    }
  }

  pub fn uses_map(&self) -> bool {
    matches!(self.kind, ModelKind::Open) || self.type_descriptors().iter().any(|ty| ty.uses_map())
  }

  pub fn uses_any(&self) -> bool {
    self.type_descriptors().iter().any(|ty| ty.uses_any())
  }
}
