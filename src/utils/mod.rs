pub mod db_utils;
pub mod hours;
pub mod reference_cache;
