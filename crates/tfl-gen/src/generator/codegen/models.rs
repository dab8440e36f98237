use std::collections::BTreeSet;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use super::{ModuleNames, generate_source};
use crate::generator::ast::{Documentation, FieldDef, GeneratedModel, ModelKind};

/// Emits one model module.
pub struct ModelGenerator<'a> {
  modules: &'a ModuleNames,
}

impl<'a> ModelGenerator<'a> {
  pub fn new(modules: &'a ModuleNames) -> Self {
    Self { modules }
  }

  pub fn generate(&self, model: &GeneratedModel) -> anyhow::Result<String> {
    generate_source(&self.tokens(model), &format!("Model `{}`", model.name))
  }

  pub fn tokens(&self, model: &GeneratedModel) -> TokenStream {
    let imports = self.imports(model);
    let docs = &model.docs;
    let name = format_ident!("{}", model.name);

    let body = match &model.kind {
      ModelKind::Record { fields } => {
        let fields = fields.iter().map(field_tokens);
        quote! {
          #docs
          #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
          pub struct #name {
            #(#fields)*
          }
        }
      }
      ModelKind::Enum { variants } => {
        let variants = variants.iter().map(|variant| {
          let tag = format_ident!("{}", variant.tag);
          let value = &variant.value;
          quote! {
            #[serde(rename = #value)]
            #tag,
          }
        });
        quote! {
          #docs
          #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
          pub enum #name {
            #(#variants)*
          }
        }
      }
      ModelKind::ListAlias { item } if model.newtype => newtype_tokens(docs, &name, &quote! { Vec<#item> }),
      ModelKind::Scalar { ty } if model.newtype => newtype_tokens(docs, &name, &ty.field_tokens()),
      ModelKind::ListAlias { item } => {
        quote! {
          #docs
          pub type #name = Vec<#item>;
        }
      }
      ModelKind::Open => quote! {
        #docs
        pub type #name = HashMap<String, Value>;
      },
      ModelKind::Scalar { ty } => quote! {
        #docs
        pub type #name = #ty;
      },
    };

    let finalize = model.cyclic.then(|| {
      quote! {
        const _: () = assert!(std::mem::size_of::<#name>() > 0);
      }
    });

    quote! {
      #![allow(non_snake_case, non_camel_case_types)]

      #imports

      #body

      #finalize
    }
  }

  /// `use` items for everything the model mentions, sorted.
  fn imports(&self, model: &GeneratedModel) -> TokenStream {
    let mut uses = BTreeSet::new();

    if model.newtype || matches!(model.kind, ModelKind::Record { .. } | ModelKind::Enum { .. }) {
      uses.insert("serde::{Deserialize, Serialize}".to_string());
    }
    if model.uses_map() {
      uses.insert("std::collections::HashMap".to_string());
    }
    if model.uses_map() || model.uses_any() {
      uses.insert("serde_json::Value".to_string());
    }
    for (reference, _) in model.references() {
      if reference == model.name {
        continue;
      }
      if let Some(stem) = self.modules.stem(reference) {
        uses.insert(format!("super::{stem}::{reference}"));
      }
    }

    let items = uses.iter().filter_map(|path| syn::parse_str::<syn::UseTree>(path).ok());
    quote! { #(use #items;)* }
  }
}

fn newtype_tokens(docs: &Documentation, name: &Ident, inner: &TokenStream) -> TokenStream {
  quote! {
    #docs
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct #name(pub #inner);
  }
}

fn field_tokens(field: &FieldDef) -> TokenStream {
  let docs = &field.docs;
  let ident = format_ident!("{}", field.ident);
  let wire = &field.wire_name;
  let ty = field.ty.field_tokens();

  if field.required {
    quote! {
      #docs
      #[serde(rename = #wire)]
      pub #ident: #ty,
    }
  } else {
    quote! {
      #docs
      #[serde(rename = #wire, default, skip_serializing_if = "Option::is_none")]
      pub #ident: Option<#ty>,
    }
  }
}
