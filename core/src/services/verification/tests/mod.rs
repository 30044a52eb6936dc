
mod sweeper_tests;
