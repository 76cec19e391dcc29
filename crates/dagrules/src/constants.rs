//! Rule document vocabulary
//!
//! Key names accepted at each level of a `dagrules.yml` document.

// ============================================================================
// DOCUMENT ROOT
// ============================================================================

/// The only rule document version this engine implements
pub const CONFIG_VERSION: &str = "1";

/// Keys allowed (and required) at the document root
pub const ROOT_KEYS: &[&str] = &["version", "rules"];

// ============================================================================
// RULES
// ============================================================================

/// Keys allowed on a rule
pub const RULE_KEYS: &[&str] = &["name", "subject", "must"];

/// Keys required on a rule
pub const RULE_REQUIRED_KEYS: &[&str] = &["name", "must"];

/// Keys allowed on a rule subject
pub const SUBJECT_KEYS: &[&str] = &["type", "tags"];

/// Subject node type used when a rule declares none
pub const DEFAULT_SUBJECT_TYPE: &str = "model";

// ============================================================================
// PREDICATES
// ============================================================================

pub const MATCH_NAME: &str = "match-name";
pub const HAVE_TAGS_ANY: &str = "have-tags-any";
pub const HAVE_CHILD_RELATIONSHIP: &str = "have-child-relationship";
pub const HAVE_PARENT_RELATIONSHIP: &str = "have-parent-relationship";

/// Keys allowed in a rule's `must` block, in evaluation order
pub const MUST_KEYS: &[&str] = &[
    MATCH_NAME,
    HAVE_TAGS_ANY,
    HAVE_CHILD_RELATIONSHIP,
    HAVE_PARENT_RELATIONSHIP,
];

/// Options understood by the relationship predicates (underscore form)
pub const RELATIONSHIP_OPTIONS: &[&str] = &[
    "cardinality",
    "required",
    "select_node_type",
    "require_node_type",
    "select_tags_any",
    "require_tags_any",
];

// ============================================================================
// TAG MATCHERS
// ============================================================================

/// Keys allowed on a mapping-form tag matcher
pub const TAG_MATCHER_KEYS: &[&str] = &["include", "exclude"];

/// Resource type reported for ids that are referenced but absent from the graph
pub const UNKNOWN_RESOURCE_TYPE: &str = "unknown";
