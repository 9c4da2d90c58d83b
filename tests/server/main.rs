mod client_api;
mod images_api;
mod suggestion_api;
