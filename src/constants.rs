pub const FIELD_SEPARATOR: char = '|';
pub const COMMENT_PREFIX: char = '#';

// page_sequence tokens may be split by commas, whitespace, or both
pub const PAGE_SEPARATORS: [char; 4] = [',', ' ', '\t', ';'];

pub const CONFIG_MIN_FIELDS: usize = 6;
pub const DEVICE_FIELDS: usize = 3;
pub const PROCESS_MIN_FIELDS: usize = 5;

pub const FIRST_PAGE: i64 = 1;
pub const MIN_LOCAL_QUOTA: usize = 1;
pub const MAX_ALLOCATION_PERCENTAGE: u32 = 100;

pub const BATCH_PLACEHOLDER: &str = "x";
pub const BATCH_ALGORITHM_TAG: &str = "FIFO";
