mod crawl_loop_tests;
