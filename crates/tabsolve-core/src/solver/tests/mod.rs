mod options_tests;
mod state_tests;
