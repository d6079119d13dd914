pub mod debounce;

pub use debounce::{
  AsyncHook,
  send_blocking,
  try_send,
};
