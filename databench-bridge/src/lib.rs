//! # Databench Bridge
//!
//! Binds page elements to a duplex message channel connected to a remote
//! analysis. Each element infers what it emits and what it listens to from
//! its own attributes; no per-element code is needed.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Page (BindableTarget tree)                     │
//! │  <button>   <span>   <input text>   <input range>+<label>   <img>   │
//! │  #log                               #databench-alerts               │
//! └─────────┬───────────────────────────────────────────────────────────┘
//!           │ Wiring::wire(channel, root)  (scan, claim, resolve names)
//!           ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Bindings                           Widgets                         │
//! │  Trigger  TextInput  TextDisplay    LogWidget      (log/warn/error) │
//! │  RangeBinding  ImageBinding         StatusLogWidget (error sink)    │
//! └─────────┬──────────────────────────────────▲────────────────────────┘
//!           │ emit(action, load)               │ on(wire signal)
//!           ▼                                  │ on_process(id)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Channel (LocalChannel: in-memory router + outbound frame queue)    │
//! └─────────────────────────────────────────────────────────────────────┘
//!           │ Frame {signal, load}             ▲
//!           ▼                                  │
//!                     transport / remote analysis
//! ```
//!
//! ## Key Components
//!
//! - [`naming`]: action name and wire signal resolution from attributes
//! - [`Binding`]: capability set shared by every element kind
//! - [`widgets`]: one binding per kind, plus the log and status banner
//! - [`Channel`] / [`LocalChannel`]: the transport seam
//! - [`Wiring`]: the orchestrator scanning a subtree
//! - [`HeadlessElement`]: in-memory [`BindableTarget`] for tests and demos
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use databench_bridge::{HeadlessElement, LocalChannel, Wiring, EventKind};
//!
//! let run = HeadlessElement::new("button").with_attr("id", "run").into_shared();
//! let body = HeadlessElement::new("body").with_child(run.clone()).into_shared();
//!
//! let wiring = Wiring::new(body);
//! let channel = LocalChannel::shared();
//! wiring.wire_all(channel.clone());
//!
//! run.dispatch(EventKind::Click);
//! for frame in channel.drain_outbound() {
//!     transport.send(frame.encode()?);
//! }
//! ```

pub mod binding;
pub mod channel;
pub mod config;
pub mod controller;
pub mod data;
pub mod dispatcher;
pub mod error;
pub mod headless;
pub mod naming;
pub mod target;

// Element bindings and aggregate widgets
pub mod widgets;

// Re-exports
pub use binding::{Binding, ElementKind};
pub use channel::{Channel, ErrorSink, Interceptor, LocalChannel, ProcessHandler, SignalHandler};
pub use config::{BridgeConfig, LogConfig, StatusConfig, TriggerConfig};
pub use controller::{ProcessController, ProcessState};
pub use data::{Frame, ProcessId, ProcessNotice, ProcessStatus, ACTION_ID_KEY, PROCESS_SIGNAL};
pub use dispatcher::{Wiring, WiringBuilder};
pub use error::{BridgeError, BridgeResult};
pub use headless::HeadlessElement;
pub use naming::{BindingNames, NameOrdinal, WireSignal};
pub use target::{BindableTarget, EventKind, ListenerId, Target};
pub use widgets::{
    ImageBinding, LogWidget, RangeBinding, StatusLogWidget, TextDisplayBinding, TextInputBinding,
    TriggerBinding,
};
