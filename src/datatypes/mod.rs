pub mod mysql_time;
pub mod sql_value;
