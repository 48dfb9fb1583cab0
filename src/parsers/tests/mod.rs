mod text_unit_tests;
