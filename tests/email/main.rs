mod generation_tests;
