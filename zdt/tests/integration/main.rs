mod runner_test;
mod tester_test;
