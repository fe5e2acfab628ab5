mod simulation_tests;
