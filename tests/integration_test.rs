#[path = "integration/common/mod.rs"]
mod common;

#[path = "integration/basic_merge.rs"]
mod basic_merge;

#[path = "integration/custom_order.rs"]
mod custom_order;

#[path = "integration/images.rs"]
mod images;

#[path = "integration/split_rotate.rs"]
mod split_rotate;

#[path = "integration/dry_run.rs"]
mod dry_run;

#[path = "integration/error_cases.rs"]
mod error_cases;

#[path = "integration/watermark.rs"]
mod watermark;
