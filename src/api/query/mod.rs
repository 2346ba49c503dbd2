//! Call results, response translation and pagination

pub mod pager;
pub mod result;
pub mod translate;

pub use pager::ItemPager;
pub use result::{ApiResult, ErrorEntry, ErrorResult, ResponseHeaders, ValidResult};
pub use translate::{PageBody, ParsedPage, parse_page, translate_error};
