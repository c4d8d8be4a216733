pub mod candle;
pub mod decoder;
pub mod device;
pub mod order;
