//! Troika Dashboard
//!
//! Chatbot management dashboard built with Leptos (WASM).
//!
//! # Features
//!
//! - Admin views: platform overview, companies, chatbots, administrators
//! - User views: usage dashboard and filtered message history
//! - Role-gated routing backed by `localStorage` session keys
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. Session, guard, pagination and wire types come from the
//! `troika` core crate; this crate adds the HTTP calls and the views.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <app::App /> });
}
