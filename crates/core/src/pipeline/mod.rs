pub mod censor_audio_use_case;
