mod nearby_tests;
