mod command_queue_tests;
