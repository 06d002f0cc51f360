mod health_check;
mod helpers;
mod rate_limit;
mod stats;
mod static_files;
