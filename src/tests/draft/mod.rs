mod autosave_tests;
mod codec_tests;
