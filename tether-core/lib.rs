pub mod chars;
pub mod position;
pub mod ranking;
pub mod token;

pub use position::{
  Position,
  Range,
};
pub use token::TokenInfo;
