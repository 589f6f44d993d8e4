/*!
# Excelviz

A web service for Excel-backed data analytics, built in Rust.

## Overview

Users upload Excel spreadsheets; the server parses them into a row
store, classifies the columns into numeric and text sets, builds
chart-library-ready payloads, and persists every upload as a JSON
document next to the original bytes. A JWT auth layer guards the API
and an admin surface handles user and upload management. Rendering the
charts is a client concern; this crate stops at the payload.

## Architecture

The application follows a client-server architecture:

### API Layer
- **Technologies**: Rust, axum, tower-http
- **Key Components**:
  - Auth endpoints - Registration, login, password reset
  - Upload pipeline - Multipart intake, parsing, classification
  - Analysis endpoints - Chart configuration and shaped views
  - Admin endpoints - Dashboard, user management, upload purges

### Analytics Core
- **Core Components**:
  - Dataset - Ordered rows of typed cells with a column classifier
  - Chart Builder - Per-kind payload construction (2D and 3D)
  - Analysis Record - Upload metadata plus chart lifecycle

### Data Persistence Layer
- File-backed JSON document store, one document per upload
- Raw upload bytes kept gzip-compressed beside their record
- Per-user directories, whole-document writes

## Modules

- **dataset**: Rows, cell values and the column classifier
- **chart**: Chart kinds, payload types and the payload builders
- **analysis**: The persisted analysis record and its lifecycle
- **error**: The crate-wide error taxonomy
- **loader**: Excel parsing into datasets
- **downloader**: Dataset re-serialization to fresh workbooks
- **saving**: Gzip persistence of raw bytes
- **store**: The file-backed document store
- **login**: Users, password hashing, tokens, auth middleware
- **mailer**: Password reset delivery over SMTP
- **admin**: Admin dashboard and user management handlers
- **app**: Routing, state and the upload/analysis handlers
- **config**: Environment-driven configuration
*/

pub mod analysis;
pub mod chart;
pub mod dataset;
pub mod error;

#[cfg(feature = "web")]
pub mod admin;
#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod downloader;
#[cfg(feature = "web")]
pub mod loader;
#[cfg(feature = "web")]
pub mod login;
#[cfg(feature = "web")]
pub mod mailer;
#[cfg(feature = "web")]
pub mod saving;
#[cfg(feature = "web")]
pub mod store;

/// Re-export the core types so callers can use the crate root directly
pub use analysis::*;
pub use chart::*;
pub use dataset::*;
pub use error::*;
