mod address_tests;
