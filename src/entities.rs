pub mod package_record;
pub mod pip_list_response;
