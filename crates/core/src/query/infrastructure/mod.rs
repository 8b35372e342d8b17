pub mod poll_worker;
