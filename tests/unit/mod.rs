mod property_tests;
mod repository_tests;
