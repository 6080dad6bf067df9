mod in_memory_sink;
