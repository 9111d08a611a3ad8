//! The crawl URI record and its scheduling metadata

use crate::frontier::FetchStatus;
use crate::uri::now_ms;

/// How a URI was discovered from its `via` URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViaContext {
    /// Found as a navigational link in fetched content
    Link,

    /// Target of an HTTP redirect
    Redirect,

    /// Embedded resource (image, stylesheet, frame, ...)
    Embed,

    /// Speculatively extracted (e.g. from scripts)
    Speculative,

    /// A precondition that must be fetched first (e.g. robots.txt)
    Prerequisite,
}

impl ViaContext {
    /// Converts the context to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Redirect => "redirect",
            Self::Embed => "embed",
            Self::Speculative => "speculative",
            Self::Prerequisite => "prerequisite",
        }
    }

    /// Parses a context from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "link" => Some(Self::Link),
            "redirect" => Some(Self::Redirect),
            "embed" => Some(Self::Embed),
            "speculative" => Some(Self::Speculative),
            "prerequisite" => Some(Self::Prerequisite),
            _ => None,
        }
    }
}

/// Scheduling priority directive for a URI record
///
/// Ordering matters: `Normal < Medium < High < Highest`. Anything above
/// `Normal` is placed in the grouped high-priority run at the head of its
/// host queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchedulingDirective {
    Normal,
    Medium,
    High,
    Highest,
}

impl SchedulingDirective {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Highest => "highest",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "highest" => Some(Self::Highest),
            _ => None,
        }
    }
}

/// A URI known to the frontier, with its discovery path and scheduling state
///
/// Records are created on discovery (or seed load), mutated by the scheduler
/// at each issue/finish transition, and dropped on terminal disposition.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlUri {
    /// The absolute URI string
    pub uri: String,

    /// Grouping token assigning this record to a host queue. Empty until
    /// the scheduler derives it at admission time.
    pub class_key: String,

    /// Hop-type path from the seed, one character per hop (e.g. "LLE")
    pub path_from_seed: String,

    /// The URI this record was discovered from, if any
    pub via: Option<String>,

    /// How this record was discovered from `via`
    pub via_context: Option<ViaContext>,

    /// Whether this record is a seed
    pub is_seed: bool,

    /// Scheduling priority
    pub directive: SchedulingDirective,

    /// Number of times this record has been issued and finished
    pub fetch_attempts: u32,

    /// Earliest wall-clock time (epoch ms) this record may be fetched
    pub next_processing_ms: i64,

    /// Status of the most recent fetch, if any
    pub last_fetch_status: Option<FetchStatus>,

    /// Bypass duplicate suppression when re-admitting (used to refetch
    /// preconditions)
    pub force_fetch: bool,
}

impl CrawlUri {
    /// Creates a record for a freshly discovered URI, fetchable immediately
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            class_key: String::new(),
            path_from_seed: String::new(),
            via: None,
            via_context: None,
            is_seed: false,
            directive: SchedulingDirective::Normal,
            fetch_attempts: 0,
            next_processing_ms: now_ms(),
            last_fetch_status: None,
            force_fetch: false,
        }
    }

    /// Creates a seed record. Seeds get rapid (Medium) scheduling.
    pub fn seed(uri: impl Into<String>) -> Self {
        Self {
            is_seed: true,
            directive: SchedulingDirective::Medium,
            ..Self::new(uri)
        }
    }

    /// Creates a record discovered from another URI
    pub fn discovered(
        uri: impl Into<String>,
        via: impl Into<String>,
        context: ViaContext,
        path_from_seed: impl Into<String>,
    ) -> Self {
        Self {
            via: Some(via.into()),
            via_context: Some(context),
            path_from_seed: path_from_seed.into(),
            ..Self::new(uri)
        }
    }

    /// Number of trailing non-navigational hops (see
    /// [`trans_hop_count`](crate::uri::trans_hop_count))
    pub fn trans_hop_count(&self) -> u32 {
        super::trans_hop_count(&self.path_from_seed)
    }

    /// True if this seed record is the product of a seed redirect: it was
    /// discovered via another URI rather than loaded from the seed list.
    pub fn is_seed_redirect(&self) -> bool {
        self.is_seed && self.via.is_some() && !self.path_from_seed.is_empty()
    }
}
