pub mod permutation;
pub mod query;
pub mod sampler;

pub use permutation::Permutation;
pub use query::{FilterConfig, SearchQuery, SortBy, TIME_PERIODS};
pub use sampler::{generate_seed, SampledPage, SamplingPaginator, UpstreamPage, UpstreamSearch};
