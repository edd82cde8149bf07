//! Tagged `key=value` line protocol spoken with the flight computer.
//!
//! ```text
//! /i=<int>                     message interval (ms)
//! !asd=<0|1> !atg=<float>      altimeter STD mode / setting (Pa)
//! %imu %mag %prs %dif=<0|1>    subsystem health
//! $gn1 $gn2 $gn3=<0|1>         ground contact
//! $aoa $tat $ax..$gz $mhd $prs $dif=<float>
//! &pit &rol &trn ... &mac=<float>
//! +                            end of frame
//! ```

pub mod decoder;
pub mod encoder;

pub use decoder::{DecoderConfig, DecoderStats, FrameDecoder, FrameOutcome, LineEvent, LinkHealth};
pub use encoder::{LinkWriter, OutboundFrame, SettingCommand};

pub const END_OF_FRAME: &str = "+";
