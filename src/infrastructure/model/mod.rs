mod candle_whisper;

pub use candle_whisper::CandleWhisper;
