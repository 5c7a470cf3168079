use alloc::string::String;

crate::reflect!(pod String as "String");
