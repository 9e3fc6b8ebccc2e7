pub mod cache_request_info;
