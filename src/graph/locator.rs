//! Schema Locator
//!
//! Enumerates every schema-bearing address of a document: named component
//! schemas plus the inline schemas of parameters, headers, request bodies and
//! responses. Addresses are JSON-pointer style (`#/paths/~1pets/get/...`) and
//! unique, so repeated passes over the same document dedup by address.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use crate::document::{child_address, entries, field, index_address, items, mapping, HTTP_METHODS, ROOT};

/// Where a schema site was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SiteKind {
    /// `components.schemas.<name>`
    Named,
    /// `components.parameters.<name>` schema or content schema
    ComponentParameter,
    /// `components.headers.<name>` schema or content schema
    ComponentHeader,
    /// `components.requestBodies.<name>` content schema
    ComponentRequestBody,
    /// `components.responses.<name>` content schema
    ComponentResponse,
    /// Path-item level parameter schema
    PathParameter,
    /// Operation level parameter schema
    OperationParameter,
    /// Operation request body content schema
    RequestBody,
    /// Operation response content schema
    Response,
}

/// One schema-bearing location
#[derive(Debug, Clone, Copy)]
pub struct SchemaSite<'a> {
    pub kind: SiteKind,
    pub node: &'a Value,
}

/// Deduplicated schema sites of one document, in discovery order
#[derive(Debug, Default)]
pub struct SchemaSites<'a> {
    sites: IndexMap<String, SchemaSite<'a>>,
}

impl<'a> SchemaSites<'a> {
    /// Record a site; an address already present keeps its first entry
    pub fn insert(&mut self, address: String, kind: SiteKind, node: &'a Value) -> bool {
        if mapping(node).is_none() || self.sites.contains_key(&address) {
            return false;
        }
        self.sites.insert(address, SchemaSite { kind, node });
        true
    }

    pub fn get(&self, address: &str) -> Option<&SchemaSite<'a>> {
        self.sites.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaSite<'a>)> {
        self.sites.iter().map(|(address, site)| (address.as_str(), site))
    }

    /// Named component schemas only
    pub fn named(&self) -> impl Iterator<Item = (&str, &SchemaSite<'a>)> {
        self.iter().filter(|(_, site)| site.kind == SiteKind::Named)
    }

    /// Number of sites that are not named component schemas
    pub fn inline_count(&self) -> usize {
        self.sites.values().filter(|site| site.kind != SiteKind::Named).count()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Locate every schema site in `doc`
pub fn locate_schemas(doc: &Value) -> SchemaSites<'_> {
    let mut sites = SchemaSites::default();
    locate_component_schemas(doc, &mut sites);
    locate_path_schemas(doc, &mut sites);
    sites
}

/// Named schemas and component-level parameter, header, body and response schemas
pub fn locate_component_schemas<'a>(doc: &'a Value, sites: &mut SchemaSites<'a>) {
    let Some(components) = field(doc, "components") else {
        return;
    };
    let base = child_address(ROOT, "components");

    let schemas_base = child_address(&base, "schemas");
    for (name, schema) in section(components, "schemas") {
        sites.insert(child_address(&schemas_base, &name), SiteKind::Named, schema);
    }

    let parameters_base = child_address(&base, "parameters");
    for (name, parameter) in section(components, "parameters") {
        let address = child_address(&parameters_base, &name);
        schema_and_content(&address, parameter, SiteKind::ComponentParameter, sites);
    }

    let headers_base = child_address(&base, "headers");
    for (name, header) in section(components, "headers") {
        let address = child_address(&headers_base, &name);
        schema_and_content(&address, header, SiteKind::ComponentHeader, sites);
    }

    let bodies_base = child_address(&base, "requestBodies");
    for (name, body) in section(components, "requestBodies") {
        let address = child_address(&bodies_base, &name);
        content_schemas(&address, body, SiteKind::ComponentRequestBody, sites);
    }

    let responses_base = child_address(&base, "responses");
    for (name, response) in section(components, "responses") {
        let address = child_address(&responses_base, &name);
        content_schemas(&address, response, SiteKind::ComponentResponse, sites);
    }
}

/// Parameter, request body and response schemas under `paths`
pub fn locate_path_schemas<'a>(doc: &'a Value, sites: &mut SchemaSites<'a>) {
    let Some(paths) = field(doc, "paths") else {
        return;
    };
    let paths_base = child_address(ROOT, "paths");

    for (path, item) in entries(paths) {
        let item_address = child_address(&paths_base, &path);
        parameter_schemas(&item_address, item, SiteKind::PathParameter, sites);

        for (method, operation) in operations(item) {
            let op_address = child_address(&item_address, &method);
            parameter_schemas(&op_address, operation, SiteKind::OperationParameter, sites);

            if let Some(body) = field(operation, "requestBody") {
                content_schemas(&child_address(&op_address, "requestBody"), body, SiteKind::RequestBody, sites);
            }

            if let Some(responses) = field(operation, "responses") {
                let responses_base = child_address(&op_address, "responses");
                for (status, response) in entries(responses) {
                    content_schemas(&child_address(&responses_base, &status), response, SiteKind::Response, sites);
                }
            }
        }
    }
}

/// Operations of a path item, keyed by their original method key
pub fn operations(item: &Value) -> impl Iterator<Item = (std::borrow::Cow<'_, str>, &Value)> {
    entries(item).filter(|(key, op)| {
        mapping(op).is_some() && HTTP_METHODS.contains(&key.to_ascii_lowercase().as_str())
    })
}

fn section<'a>(components: &'a Value, name: &str) -> impl Iterator<Item = (std::borrow::Cow<'a, str>, &'a Value)> {
    field(components, name).into_iter().flat_map(entries)
}

fn parameter_schemas<'a>(base: &str, owner: &'a Value, kind: SiteKind, sites: &mut SchemaSites<'a>) {
    let Some(parameters) = field(owner, "parameters") else {
        return;
    };
    let parameters_base = child_address(base, "parameters");
    for (index, parameter) in items(parameters).iter().enumerate() {
        schema_and_content(&index_address(&parameters_base, index), parameter, kind, sites);
    }
}

fn schema_and_content<'a>(address: &str, owner: &'a Value, kind: SiteKind, sites: &mut SchemaSites<'a>) {
    if let Some(schema) = field(owner, "schema") {
        sites.insert(child_address(address, "schema"), kind, schema);
    }
    content_schemas(address, owner, kind, sites);
}

fn content_schemas<'a>(address: &str, owner: &'a Value, kind: SiteKind, sites: &mut SchemaSites<'a>) {
    let Some(content) = field(owner, "content") else {
        return;
    };
    let content_base = child_address(address, "content");
    for (media_type, media) in entries(content) {
        if let Some(schema) = field(media, "schema") {
            let media_address = child_address(&content_base, &media_type);
            sites.insert(child_address(&media_address, "schema"), kind, schema);
        }
    }
}
