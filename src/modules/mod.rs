pub mod sqlite;
pub mod work_hours;
