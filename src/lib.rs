// Módulos de la aplicación
pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod controller;
pub mod demo;
pub mod errors;
pub mod evidence;
pub mod html;
pub mod models;
pub mod render;
pub mod request;
pub mod session;
pub mod tabs;
pub mod validators;
