mod ec;
mod framework;
mod layout;
mod non_native;
mod range_check;
mod unified_addition;
