// Declarative field mapping: canonical field -> candidate source paths in priority order
use crate::model::{Dimension, Domain};
use crate::parser::RawAnalysisPayload;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Canonical fields of an `AnalysisView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AsOfDate,
    FragilityColor,
    FragilityLabel,
    FragilityScore,
    PhaseUsed,
    PhaseConfidence,
    DimensionScore(Dimension),
    DimensionCommentary(Dimension),
    Headline,
    RationaleBullets,
    PlainEnglishSummary,
    NextTriggers,
    CycleStagePrimary,
    CycleStageTransition,
    MacroPostureLabel,
    CycleTone,
    Domains,
    DomainDetails,
    TemplateCode,
    TemplateName,
    PatternPlain,
    PostureLabel,
    KeyDrivers,
    NextWatch,
    CycleStage,
    GuidanceLabel,
    WatchCommentary,
}

/// Where a candidate value lives. Paths are dot-separated; numeric segments
/// index into arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePath {
    /// The domain's own `fullAnalysis` document.
    Nested(&'static str),
    /// The domain's own flat summary.
    Flat(&'static str),
    PeerNested(Domain, &'static str),
    PeerFlat(Domain, &'static str),
}

impl SourcePath {
    fn origin(self) -> Origin {
        match self {
            SourcePath::Nested(_) | SourcePath::PeerNested(..) => Origin::Nested,
            SourcePath::Flat(_) | SourcePath::PeerFlat(..) => Origin::Flat,
        }
    }
}

/// Authority of the document a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Nested,
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub origin: Origin,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub sources: &'static [SourcePath],
}

#[derive(Debug)]
pub struct FieldTable {
    pub domain: Domain,
    pub rules: &'static [FieldRule],
}

impl FieldTable {
    /// Candidates for `field`; a field the table does not map has none.
    pub fn sources(&self, field: Field) -> &'static [SourcePath] {
        self.rules
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| rule.sources)
            .unwrap_or(&[])
    }
}

/// Flat summaries and decoded nested documents for the domains a
/// normalization run needs. Each nested document is decoded once.
#[derive(Debug, Default)]
pub struct DecodedPayload<'a> {
    flat: BTreeMap<Domain, &'a Value>,
    nested: BTreeMap<Domain, Value>,
}

impl<'a> DecodedPayload<'a> {
    pub fn decode(raw: &'a RawAnalysisPayload, domains: &[Domain]) -> Self {
        let mut decoded = Self::default();
        for &domain in domains {
            if decoded.flat.contains_key(&domain) || decoded.nested.contains_key(&domain) {
                continue;
            }
            if let Some(flat) = raw.flat(domain) {
                decoded.flat.insert(domain, flat);
            }
            if let Some(nested) = raw.nested(domain).and_then(|n| n.decode(domain)) {
                decoded.nested.insert(domain, nested);
            }
        }
        decoded
    }

    /// At least one usable document for `domain`.
    pub fn has_documents(&self, domain: Domain) -> bool {
        self.flat.contains_key(&domain) || self.nested.contains_key(&domain)
    }

    fn lookup(&self, domain: Domain, source: SourcePath) -> Option<&Value> {
        match source {
            SourcePath::Nested(path) => self.nested.get(&domain).and_then(|d| lookup_path(d, path)),
            SourcePath::Flat(path) => self.flat.get(&domain).and_then(|d| lookup_path(d, path)),
            SourcePath::PeerNested(peer, path) => {
                self.nested.get(&peer).and_then(|d| lookup_path(d, path))
            }
            SourcePath::PeerFlat(peer, path) => {
                self.flat.get(&peer).and_then(|d| lookup_path(d, path))
            }
        }
    }

    pub fn resolver(&self, table: &'static FieldTable) -> FieldResolver<'_> {
        FieldResolver {
            docs: self,
            table,
        }
    }
}

pub fn lookup_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Null, blank strings, empty arrays and empty objects count as absent.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Evaluates one domain's field table: the first candidate that is present,
/// non-empty and of the expected type wins.
pub struct FieldResolver<'r> {
    docs: &'r DecodedPayload<'r>,
    table: &'static FieldTable,
}

impl FieldResolver<'_> {
    pub fn resolve<T>(
        &self,
        field: Field,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Option<Resolved<T>> {
        let domain = self.table.domain;
        for &source in self.table.sources(field) {
            let Some(value) = self.docs.lookup(domain, source) else {
                continue;
            };
            if is_empty_value(value) {
                continue;
            }
            match extract(value) {
                Some(extracted) => {
                    return Some(Resolved {
                        value: extracted,
                        origin: source.origin(),
                    });
                }
                None => debug!(
                    %domain,
                    ?field,
                    ?source,
                    "Ignoring candidate with unexpected shape"
                ),
            }
        }
        None
    }

    pub fn value<T>(&self, field: Field, extract: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.resolve(field, extract).map(|r| r.value)
    }

    pub fn text(&self, field: Field) -> String {
        self.value(field, super::extract::as_text).unwrap_or_default()
    }

    pub fn list(&self, field: Field) -> Vec<String> {
        self.value(field, super::extract::as_text_list)
            .unwrap_or_default()
    }
}
