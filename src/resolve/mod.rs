//! Track resolution against the slskd daemon.
//!
//! The pipeline for one track:
//! - [`query`] turns a [`TrackDescriptor`](crate::model::TrackDescriptor) into search text
//! - [`search`] runs the search job to completion
//! - [`ranker`] picks one peer result, or none
//! - [`submit`] hands the pick to the daemon's download queue
//!
//! [`connector`] brings the daemon up once per batch, and [`orchestrator`]
//! fans a whole playlist out over the pipeline.

pub mod connector;
pub mod orchestrator;
pub mod query;
pub mod ranker;
pub mod search;
pub mod submit;

pub use connector::{ConnectionError, ConnectionState, Connector, RetryPolicy, normalize_base_url};
pub use orchestrator::Resolver;
pub use ranker::{QualityBucket, Ranker, RankerConfig, Selection};
pub use search::{SearchError, SearchPoller};
pub use submit::DownloadError;
